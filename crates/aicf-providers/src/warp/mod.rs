mod reader;

pub use reader::WarpReader;
