//! Cell addressing and cell contents

mod address;
mod error;
mod value;

pub use address::{CellAddress, CellRange};
pub use error::CellError;
pub use value::{format_number, quote_text, CellValue};
