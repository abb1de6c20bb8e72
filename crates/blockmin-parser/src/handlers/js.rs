//! `js`: aggregate script references into one bundle.

use super::requirejs::module_options;
use super::{Block, BlockHandler, Replacement};
use crate::tags::SCRIPT_TAGS;
use crate::{BuildInstruction, HandlerContext, HandlerError, split_args};

const SYNTAX: &str = "<dest>";

/// Bundles every `<script src>` in the block into the destination given as
/// the directive argument.
///
/// A script carrying `data-main` also bootstraps a module bundle: its output
/// goes to `data-dest` (or `data-main`) and gets its own `<script>` tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsHandler;

impl BlockHandler for JsHandler {
    fn name(&self) -> &'static str {
        "js"
    }

    fn process(
        &self,
        block: &Block<'_>,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<Replacement, HandlerError> {
        let dest_arg = block
            .args
            .and_then(|args| split_args(args, None).first().copied())
            .ok_or(HandlerError::MissingArguments { syntax: SYNTAX })?;

        let dest = ctx.destination(dest_arg);
        ctx.verbose(format!("Set destination to {}", dest.full.display()));

        let target = ctx.target;
        let mut out_tags = Vec::new();

        for tag in SCRIPT_TAGS.extract(block.contents.unwrap_or_default()) {
            ctx.verbose(format!("Parsing tag: {}", tag.html));

            let Some(src) = tag.get("src") else {
                ctx.warn(format!("Tag missing src attribute: {}", tag.html));
                continue;
            };

            if !ctx.asset_exists(src) {
                ctx.warn(format!("Cannot find file for src: {}", tag.html));
                continue;
            }

            if out_tags.is_empty() {
                let bundle_tag = script_tag(&dest.short);
                ctx.verbose(format!("Added tag: {bundle_tag}"));
                out_tags.push(bundle_tag);
            }

            ctx.instruct(BuildInstruction::bundle(target, src, dest.full.clone()));

            let Some(main) = tag.get("data-main") else {
                continue;
            };

            let module_dest = ctx.destination(tag.get("data-dest").unwrap_or(main));
            let module_target = tag.get("data-target").unwrap_or(target);

            let module_tag = script_tag(&module_dest.short);
            ctx.verbose(format!("Added tag: {module_tag}"));
            out_tags.push(module_tag);

            let options = module_options(main, &module_dest, ctx.base_dir);
            ctx.instruct(BuildInstruction::module_bundle(
                module_target,
                format!("{main}.js"),
                module_dest.full.clone(),
                options,
            ));
            ctx.instruct(BuildInstruction::bundle(
                target,
                module_dest.full_str(),
                module_dest.full.clone(),
            ));
        }

        Ok(Replacement::Lines(out_tags))
    }
}

/// Output `<script>` tag for a bundle.
pub(super) fn script_tag(src: &str) -> String {
    format!(r#"<script src="{src}"></script>"#)
}
