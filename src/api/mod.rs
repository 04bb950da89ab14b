pub mod format;

pub use format::{long_views, short_views, LongDrink, ShortDrink, ShortIngredient};
