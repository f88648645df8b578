pub mod dataset;
pub mod evaluate;
pub mod export;
pub mod paginate;
pub mod predicate;
pub mod predicate_set;
pub mod projection;
pub mod scatter;
pub mod session;
#[cfg(test)]
mod testing;

pub use dataset::{ColumnInfo, ColumnKind, Dataset};
pub use evaluate::{apply, build_mask, FilterDiagnostic, FilterOutcome, FilteredView, RowMask};
pub use frame_lens_common::{FrameLensError, Result};
pub use paginate::{page, page_count, NavAction, Page, PageError, PageState};
pub use predicate::{FilterError, Operator, Predicate};
pub use predicate_set::{PredicateKey, PredicateSet, PredicateUpdate};
pub use projection::{project, project_strict, CellValue, ProjectionError, Record};
pub use scatter::{build_scatter, FigureError, ScatterFigure, ScatterSeries, ScatterSpec};
pub use session::{ExplorerSession, PageOutput};
