pub mod polopt;
