// Public library interface for silvascan
// The CLI and the debug-layout tool both drive the core through these modules

pub mod app;
pub mod layout;
pub mod scanner;
pub mod tree;
pub mod ui;
