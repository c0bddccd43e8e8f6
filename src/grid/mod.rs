//! Generic data grid: records, column definitions, filters, and the
//! search/sort/paginate pipeline shared by every entity list.

pub mod column;
pub mod dates;
pub mod export;
pub mod filter;
pub mod picker;
pub mod record;
pub mod table;

pub use column::{Column, ColumnKind};
pub use export::{CsvFileExporter, Exporter};
pub use filter::{ActiveFilters, FilterChange};
pub use picker::{candidate_values, DateField, DateMode, DatePicker, ValuePicker};
pub use record::{Record, Value};
pub use table::{DataTable, TableView};
