pub mod config;
pub mod net;
pub mod rdt;
pub mod sim;
pub mod viz;

#[cfg(test)]
mod test;
