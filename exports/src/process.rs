pub use stockpile_process::ProcFs;
pub use stockpile_process::ProcessEntry;
pub use stockpile_process::LocateError;
pub use stockpile_process::find_process_by_name;
