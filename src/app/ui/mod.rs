mod controls;
mod details;
mod footer;
mod panels;
