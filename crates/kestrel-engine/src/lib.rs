//! Kestrel Engine
//!
//! Ties the element tree, the style system and the decoration layer into
//! one [`Context`].
//!
//! # Example
//!
//! ```rust,ignore
//! use kestrel_engine::{Config, Context, RecordingRenderInterface};
//! use std::{cell::RefCell, rc::Rc};
//!
//! let backend = Rc::new(RefCell::new(RecordingRenderInterface::new()));
//! let mut context = Context::new(Config::default(), backend.clone());
//! context.add_style_sheet("div.card { filter: blur(4px); }", "mem://app.rcss")?;
//!
//! let root = context.document().root();
//! let card = context.document_mut().append_element(root, "div");
//! context.document_mut().tree.set_class(card, "card", true);
//!
//! context.update();
//! context.render();
//! ```

mod config;
mod context;
mod logging;

pub use config::Config;
pub use context::Context;
pub use logging::init_logging;

pub use kestrel_css::{CssError, StyleSheet};
pub use kestrel_dom::{Document, ElementId};
pub use kestrel_render::{RecordingRenderInterface, RenderInterface, SharedRenderInterface};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Style sheet error: {0}")]
    Css(#[from] CssError),

    #[error("Element {0:?} has no computed style")]
    UnknownElement(ElementId),
}
