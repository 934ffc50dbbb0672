pub mod builder;
pub mod render;
pub mod table;

pub use builder::TableBuilder;
pub use render::{render_all, render_interchange, render_markdown, render_source, InterchangeDoc};
pub use table::{pair_key, DirectionTable, StaticTable};
