pub mod running_mean;
pub mod window;
