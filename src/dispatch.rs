//! Control → output wiring for the dashboard.
//!
//! Each output chart is produced by a plain function of the current control
//! values and the immutable dataset. A control change re-renders exactly the
//! outputs bound to that control.

use std::fmt;
use std::str::FromStr;

use crate::color::ColorMap;
use crate::data::filter::{payload_outcome_points, site_success_counts};
use crate::data::model::{LaunchDataset, COL_BOOSTER_CATEGORY};
use crate::error::ApiError;
use crate::state::DashboardInputs;
use crate::ui::figures::{self, Figure};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Input controls on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    SiteDropdown,
    PayloadSlider,
}

impl Control {
    pub const ALL: [Control; 2] = [Control::SiteDropdown, Control::PayloadSlider];

    pub fn id(self) -> &'static str {
        match self {
            Control::SiteDropdown => "site-dropdown",
            Control::PayloadSlider => "payload-slider",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Control {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Control::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| ApiError::UnknownControl(s.to_string()))
    }
}

/// Chart outputs on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    SuccessPieChart,
    PayloadScatterChart,
}

impl Output {
    pub fn id(self) -> &'static str {
        match self {
            Output::SuccessPieChart => "success-pie-chart",
            Output::PayloadScatterChart => "success-payload-scatter-chart",
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Everything a handler may read. Borrowed for the duration of one dispatch.
pub struct RenderContext<'a> {
    pub dataset: &'a LaunchDataset,
    pub colors: &'a ColorMap,
}

pub type Handler = fn(&RenderContext<'_>, &DashboardInputs) -> Figure;

fn render_success_pie(ctx: &RenderContext<'_>, inputs: &DashboardInputs) -> Figure {
    figures::success_pie(&site_success_counts(ctx.dataset, &inputs.site))
}

fn render_payload_scatter(ctx: &RenderContext<'_>, inputs: &DashboardInputs) -> Figure {
    let scatter = payload_outcome_points(ctx.dataset, &inputs.site, inputs.payload);
    figures::payload_scatter(&scatter, ctx.colors)
}

struct Binding {
    output: Output,
    inputs: &'static [Control],
    handler: Handler,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Maps controls to the outputs that depend on them.
pub struct Dispatcher {
    bindings: Vec<Binding>,
    colors: ColorMap,
}

impl Dispatcher {
    /// The dashboard's wiring: the site dropdown drives both charts, the
    /// payload slider drives only the scatter chart.
    pub fn new(dataset: &LaunchDataset) -> Self {
        let bindings = vec![
            Binding {
                output: Output::SuccessPieChart,
                inputs: &[Control::SiteDropdown],
                handler: render_success_pie,
            },
            Binding {
                output: Output::PayloadScatterChart,
                inputs: &[Control::SiteDropdown, Control::PayloadSlider],
                handler: render_payload_scatter,
            },
        ];
        let colors = ColorMap::new(COL_BOOSTER_CATEGORY, dataset.booster_categories());
        for (category, color) in colors.legend_entries() {
            log::debug!("{}: {category} -> {color}", colors.column);
        }
        Self { bindings, colors }
    }

    pub fn outputs_for(&self, control: Control) -> Vec<Output> {
        self.bindings
            .iter()
            .filter(|b| b.inputs.contains(&control))
            .map(|b| b.output)
            .collect()
    }

    /// Re-render every output bound to `control`.
    pub fn dispatch(
        &self,
        dataset: &LaunchDataset,
        control: Control,
        inputs: &DashboardInputs,
    ) -> Vec<(Output, Figure)> {
        log::debug!(
            "{control} changed (site={}, payload=[{}, {}])",
            inputs.site,
            inputs.payload.lo(),
            inputs.payload.hi()
        );
        let targets = self.outputs_for(control);
        self.render_where(dataset, inputs, |b| targets.contains(&b.output))
    }

    /// Render every output, as on first page load.
    pub fn render_all(&self, dataset: &LaunchDataset, inputs: &DashboardInputs) -> Vec<(Output, Figure)> {
        self.render_where(dataset, inputs, |_| true)
    }

    /// Render a single output.
    pub fn render(&self, dataset: &LaunchDataset, output: Output, inputs: &DashboardInputs) -> Option<Figure> {
        self.render_where(dataset, inputs, |b| b.output == output)
            .into_iter()
            .next()
            .map(|(_, fig)| fig)
    }

    fn render_where(
        &self,
        dataset: &LaunchDataset,
        inputs: &DashboardInputs,
        select: impl Fn(&Binding) -> bool,
    ) -> Vec<(Output, Figure)> {
        let ctx = RenderContext {
            dataset,
            colors: &self.colors,
        };
        self.bindings
            .iter()
            .filter(|b| select(b))
            .map(|b| (b.output, (b.handler)(&ctx, inputs)))
            .collect()
    }
}
