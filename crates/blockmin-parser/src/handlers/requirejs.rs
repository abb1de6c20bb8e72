//! `requirejs`: bootstrap a module-bundled application.
//!
//! `<!--build:requirejs js/main dist/main.js release {"optimize": "none"}/-->`
//! becomes one `<script>` tag for the bundle, plus a module-bundle
//! instruction and a minify pass over its output.

use std::path::Path;

use serde_json::{Map, Value};

use super::js::script_tag;
use super::{Block, BlockHandler, Replacement};
use crate::{BuildInstruction, Destination, HandlerContext, HandlerError, ModuleArgs};

/// Handler for module-loader bootstrap directives.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireJsHandler;

impl BlockHandler for RequireJsHandler {
    fn name(&self) -> &'static str {
        "requirejs"
    }

    fn process(
        &self,
        block: &Block<'_>,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<Replacement, HandlerError> {
        let args = ModuleArgs::parse(block.args)?;
        ctx.verbose(format!("Set main to {}", args.main));

        let dest = if let Some(dest) = &args.dest {
            let dest = ctx.destination(dest);
            ctx.verbose(format!("Set destination to {}", dest.full.display()));
            dest
        } else {
            ctx.destination(&format!("{}.js", args.main))
        };

        let target = if let Some(target) = args.target {
            ctx.verbose(format!("Set target to {target}"));
            target
        } else {
            ctx.target.to_owned()
        };

        if let Some(ignored) = &args.ignored {
            ctx.notice(format!("Ignoring extra arguments: {ignored}"));
        }

        let tag = script_tag(&dest.short);
        ctx.verbose(format!("Added tag: {tag}"));

        let mut options = module_options(&args.main, &dest, ctx.base_dir);
        options.extend(args.options);

        ctx.instruct(BuildInstruction::module_bundle(
            &target,
            format!("{}.js", args.main),
            dest.full.clone(),
            options,
        ));
        ctx.instruct(BuildInstruction::bundle(
            &target,
            dest.full_str(),
            dest.full.clone(),
        ));

        Ok(Replacement::Lines(vec![tag]))
    }
}

/// Module bundler options for entry module `main` written to `dest`.
///
/// A `main` without a directory component uses `base_dir` as `baseUrl`.
pub(super) fn module_options(main: &str, dest: &Destination, base_dir: &Path) -> Map<String, Value> {
    let main_path = Path::new(main);
    let base_url = main_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(base_dir);
    let name = main_path
        .file_name()
        .map_or_else(|| main.to_owned(), |n| n.to_string_lossy().into_owned());

    let mut options = Map::new();
    options.insert(
        "baseUrl".to_owned(),
        Value::String(base_url.to_string_lossy().into_owned()),
    );
    options.insert("name".to_owned(), Value::String(name));
    options.insert("out".to_owned(), Value::String(dest.full_str()));
    options.insert(
        "mainConfigFile".to_owned(),
        Value::String(format!("{main}.js")),
    );
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstructionKind;
    use crate::context::testing::Fixture;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(args: Option<&str>) -> (Result<Replacement, HandlerError>, Fixture) {
        let block = Block {
            kind: "requirejs",
            args,
            contents: None,
            indent: "",
        };
        let mut fixture = Fixture::new(&[]);
        let result = fixture.run(|ctx| RequireJsHandler.process(&block, ctx));
        (result, fixture)
    }

    #[test]
    fn test_defaults() {
        let (result, fixture) = run(Some("app"));
        assert_eq!(
            result.unwrap(),
            Replacement::Lines(vec![r#"<script src="app.js"></script>"#.to_owned()])
        );

        let instructions = fixture.instructions();
        assert_eq!(instructions.len(), 2);

        let bundle = instructions[0];
        assert_eq!(bundle.kind, InstructionKind::ModuleBundle);
        assert_eq!(bundle.target, "dist");
        assert_eq!(bundle.src, "app.js");
        assert_eq!(bundle.dest, Path::new("/www/app.js"));
        let options = bundle.options.as_ref().unwrap();
        assert_eq!(options["baseUrl"], json!("/www"));
        assert_eq!(options["name"], json!("app"));
        assert_eq!(options["out"], json!("/www/app.js"));
        assert_eq!(options["mainConfigFile"], json!("app.js"));

        let minify = instructions[1];
        assert_eq!(minify.kind, InstructionKind::Bundle);
        assert_eq!(minify.src, "/www/app.js");
        assert_eq!(minify.dest, Path::new("/www/app.js"));
    }

    #[test]
    fn test_nested_main_dest_and_target() {
        let (result, fixture) = run(Some("js/main dist/main.min.js release"));
        assert_eq!(
            result.unwrap(),
            Replacement::Lines(vec![r#"<script src="dist/main.min.js"></script>"#.to_owned()])
        );
        let instructions = fixture.instructions();
        assert!(instructions.iter().all(|i| i.target == "release"));
        let options = instructions[0].options.as_ref().unwrap();
        assert_eq!(options["baseUrl"], json!("js"));
        assert_eq!(options["name"], json!("main"));
        assert_eq!(options["out"], json!("/www/dist/main.min.js"));
    }

    #[test]
    fn test_json_options_override_defaults() {
        let (result, fixture) = run(Some(r#"js/main {"baseUrl": "lib", "optimize": "none"}"#));
        assert!(result.is_ok());
        let options = fixture.instructions()[0].options.clone().unwrap();
        assert_eq!(options["baseUrl"], json!("lib"));
        assert_eq!(options["optimize"], json!("none"));
        assert_eq!(options["name"], json!("main"));
    }

    #[test]
    fn test_missing_args_is_fatal() {
        let (result, fixture) = run(None);
        assert!(matches!(result, Err(HandlerError::MissingArguments { .. })));
        assert!(fixture.instructions().is_empty());
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let (result, _) = run(Some("app {oops"));
        assert!(matches!(result, Err(HandlerError::InvalidJson { .. })));
    }
}
