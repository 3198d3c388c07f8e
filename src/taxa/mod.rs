mod error;
mod load;
mod overlay;
mod parse;
pub(crate) mod tree;

pub use error::TaxaError;
pub use load::load_taxa;
pub use tree::{TaxonNode, TaxonTree};
