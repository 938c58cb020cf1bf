pub mod config;
pub mod evaluate;
pub mod map_run;
pub mod replay;
