//! Unit test modules.

mod row_selection_test;
