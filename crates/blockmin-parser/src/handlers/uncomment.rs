//! `uncomment`: turn commented-out markup back into live markup.

use std::sync::LazyLock;

use regex::Regex;

use super::{Block, BlockHandler, Replacement};
use crate::{HandlerContext, HandlerError};

static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)<!--").unwrap());
static CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-->(\s*)$").unwrap());

/// Strips one leading `<!--` and one trailing `-->` from the block contents,
/// keeping the surrounding whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct UncommentHandler;

impl BlockHandler for UncommentHandler {
    fn name(&self) -> &'static str {
        "uncomment"
    }

    fn process(
        &self,
        block: &Block<'_>,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<Replacement, HandlerError> {
        let Some(contents) = block.contents else {
            return Ok(Replacement::Empty);
        };

        let opened = OPEN_RE.replace(contents, "$1");
        let closed = CLOSE_RE.replace(&opened, "$1");
        Ok(Replacement::Text(closed.into_owned()))
    }
}
