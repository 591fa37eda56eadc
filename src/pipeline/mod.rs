//! Pipeline entry points for vacancy operations.
//!
//! - `run_search`: Fetch vacancies from hh.ru, normalize and store them
//! - `run_details`: Fetch and normalize a single vacancy
//! - `run_top` / `run_find`: Browse stored vacancies
//! - `run_delete` / `run_export`: Maintain and export the store
//! - `run_menu`: Interactive loop over the operations above

pub mod browse;
pub mod menu;
pub mod search;

pub use browse::{run_delete, run_export, run_find, run_top};
pub use menu::{MenuContext, print_vacancies, run_menu};
pub use search::{SearchOutcome, run_details, run_search};
