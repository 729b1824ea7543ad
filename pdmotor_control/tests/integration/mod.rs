mod closed_loop;
mod commands;
mod properties;
mod scheduling;
mod timer_programming;
