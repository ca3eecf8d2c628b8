// Adapters layer: concrete implementations for external systems (chart backend, benchmark output).

pub mod gobench;
pub mod plotters_renderer;
