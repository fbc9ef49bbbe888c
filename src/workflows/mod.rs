pub mod enforcement;
