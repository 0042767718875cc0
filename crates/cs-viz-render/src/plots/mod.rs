pub mod response;
pub mod shower_shapes;

mod axes_draw;
