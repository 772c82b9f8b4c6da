mod builder;
mod helpers;
