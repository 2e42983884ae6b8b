/// Browser-facing layer: the dashboard page and the chart figures it draws.
///
/// ```text
///   SuccessBreakdown / PayloadScatter
///        │
///        ▼
///   ┌──────────┐
///   │ figures  │  Plotly JSON (pie, scatter per booster category)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  page    │  HTML + controls, redraws figures on change
///   └──────────┘
/// ```

pub mod figures;
pub mod page;
