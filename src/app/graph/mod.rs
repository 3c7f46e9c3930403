mod layout;
mod view;

pub(in crate::app) use layout::{GraphLayout, LayoutMode};
