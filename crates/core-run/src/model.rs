use core_grid::Grid;
use core_msg::{Effect, Message};

/// Application logic supplied by the client. The runner never calls `update`
/// and `draw` concurrently with themselves or each other.
pub trait Model<U> {
    fn update(&mut self, msg: Message<U>) -> Effect<U>;
    fn draw(&self) -> Grid;
}
