mod mock;

mod congestion;
mod link;
mod packet;
mod sim_time;
