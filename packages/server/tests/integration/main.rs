mod common;

mod lesson;
mod results;
mod situational;
