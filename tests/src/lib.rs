#[cfg(test)]
mod common;

#[cfg(test)]
mod auth_gate;
