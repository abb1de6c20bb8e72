//! Parse events and build instructions.
//!
//! The parser never runs bundlers or compilers. Everything it wants done is
//! emitted as a [`BuildInstruction`] through an [`EventSink`], alongside block
//! lifecycle notifications and diagnostics.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

/// Kind of work requested from an external build tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstructionKind {
    /// Concatenate and minify `src` into `dest`.
    Bundle,
    /// Run the module bundler (r.js style) with `options`.
    ModuleBundle,
    /// Compile a stylesheet into `dest`, appending to earlier output.
    StyleCompile,
}

/// A request for an external build step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildInstruction {
    /// What to do.
    pub kind: InstructionKind,
    /// Build target name.
    pub target: String,
    /// Source path, as referenced in the document.
    pub src: String,
    /// Destination path on disk.
    pub dest: PathBuf,
    /// Tool options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

impl BuildInstruction {
    /// Create a bundle (concatenate + minify) instruction.
    #[must_use]
    pub fn bundle(target: impl Into<String>, src: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self::new(InstructionKind::Bundle, target, src, dest)
    }

    /// Create a stylesheet compile instruction.
    #[must_use]
    pub fn style_compile(
        target: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<PathBuf>,
    ) -> Self {
        Self::new(InstructionKind::StyleCompile, target, src, dest)
    }

    /// Create a module bundler instruction with its options.
    #[must_use]
    pub fn module_bundle(
        target: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<PathBuf>,
        options: Map<String, Value>,
    ) -> Self {
        Self {
            options: Some(options),
            ..Self::new(InstructionKind::ModuleBundle, target, src, dest)
        }
    }

    fn new(
        kind: InstructionKind,
        target: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            src: src.into(),
            dest: dest.into(),
            options: None,
        }
    }
}

/// Notification emitted while parsing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ParseEvent {
    /// A block with an end tag was entered.
    BlockBegin {
        /// Directive type.
        kind: String,
        /// Raw arguments.
        args: Option<String>,
        /// Verbatim begin tag.
        begin_tag: String,
    },
    /// A block with an end tag was resolved.
    BlockEnd {
        /// Directive type.
        kind: String,
        /// Raw arguments.
        args: Option<String>,
        /// Verbatim begin tag.
        begin_tag: String,
        /// Resolved inner text handed to the handler.
        contents: String,
    },
    /// A self-closing block was resolved.
    BlockSingle {
        /// Directive type.
        kind: String,
        /// Raw arguments.
        args: Option<String>,
        /// Verbatim begin tag.
        begin_tag: String,
    },
    /// Human-readable progress from a handler.
    Notice {
        /// Only interesting in verbose output.
        verbose: bool,
        /// Message text.
        message: String,
    },
    /// A recoverable problem; the offending tag was skipped.
    Warning {
        /// Message text.
        message: String,
    },
    /// Work for an external build tool.
    Instruction(BuildInstruction),
}

/// Receiver of [`ParseEvent`]s.
pub trait EventSink {
    /// Handle one event.
    fn emit(&mut self, event: ParseEvent);
}

impl EventSink for Vec<ParseEvent> {
    fn emit(&mut self, event: ParseEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundle_serializes_without_options() {
        let instruction = BuildInstruction::bundle("dist", "a.js", "/www/out.js");
        let value = serde_json::to_value(&instruction).unwrap();
        assert_eq!(
            value,
            json!({"kind": "bundle", "target": "dist", "src": "a.js", "dest": "/www/out.js"})
        );
    }

    #[test]
    fn test_module_bundle_keeps_options() {
        let mut options = Map::new();
        options.insert("name".to_owned(), json!("app"));
        let instruction = BuildInstruction::module_bundle("dist", "app.js", "/www/app.js", options);
        assert_eq!(instruction.kind, InstructionKind::ModuleBundle);
        let value = serde_json::to_value(&instruction).unwrap();
        assert_eq!(value["kind"], json!("module-bundle"));
        assert_eq!(value["options"]["name"], json!("app"));
    }

    #[test]
    fn test_event_tagging() {
        let event = ParseEvent::Warning {
            message: "Cannot find file".to_owned(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"event": "warning", "message": "Cannot find file"}));
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<ParseEvent> = Vec::new();
        sink.emit(ParseEvent::Notice {
            verbose: true,
            message: "hi".to_owned(),
        });
        assert_eq!(sink.len(), 1);
    }
}
