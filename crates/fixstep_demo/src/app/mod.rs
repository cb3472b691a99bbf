mod bootstrap;
mod demo_scene;
mod headless;
mod loop_runner;

pub(crate) use loop_runner::run;
