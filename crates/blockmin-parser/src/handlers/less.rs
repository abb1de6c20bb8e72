//! `less`: compile stylesheet references into one stylesheet.

use super::{Block, BlockHandler, Replacement};
use crate::tags::LINK_TAGS;
use crate::{BuildInstruction, HandlerContext, HandlerError, split_args};

const SYNTAX: &str = "<dest>";

/// MIME type a `<link>` must declare to be compiled.
const STYLESHEET_TYPE: &str = "text/css";

/// Compiles every `<link rel type="text/css" href>` in the block into the
/// destination given as the directive argument.
#[derive(Debug, Default, Clone, Copy)]
pub struct LessHandler;

impl BlockHandler for LessHandler {
    fn name(&self) -> &'static str {
        "less"
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

        for tag in LINK_TAGS.extract(block.contents.unwrap_or_default()) {
            ctx.verbose(format!("Parsing tag: {}", tag.html));

            let Some(href) = tag.get("href") else {
                ctx.warn(format!("Tag missing href attribute: {}", tag.html));
                continue;
            };
            if tag.get("rel").is_none() {
                ctx.warn(format!("Tag missing rel attribute: {}", tag.html));
                continue;
            }
            match tag.get("type") {
                None => {
                    ctx.warn(format!("Tag missing type attribute: {}", tag.html));
                    continue;
                }
                Some(kind) if kind != STYLESHEET_TYPE => {
                    ctx.warn(format!(
                        "Tag's type attribute is not '{STYLESHEET_TYPE}': {}",
                        tag.html
                    ));
                    continue;
                }
                Some(_) => {}
            }
            if !ctx.asset_exists(href) {
                ctx.warn(format!("Cannot find file for href: {}", tag.html));
                continue;
            }

            if out_tags.is_empty() {
                let link = format!(
                    r#"<link rel="stylesheet" type="{STYLESHEET_TYPE}" href="{}">"#,
                    dest.short
                );
                ctx.verbose(format!("Added tag: {link}"));
                out_tags.push(link);
            }

            ctx.instruct(BuildInstruction::style_compile(target, href, dest.full.clone()));
        }

        Ok(Replacement::Lines(out_tags))
    }
}
