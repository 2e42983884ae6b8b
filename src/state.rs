use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::data::filter::{PayloadInterval, SiteSelection, ALL_SITES};
use crate::data::model::LaunchDataset;
use crate::dispatch::Dispatcher;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the server shares between requests. Built once at startup and
/// never mutated afterwards.
pub struct AppState {
    pub dataset: Arc<LaunchDataset>,
    pub settings: Settings,
    pub dispatcher: Dispatcher,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(dataset: LaunchDataset, settings: Settings) -> Self {
        let dispatcher = Dispatcher::new(&dataset);
        Self {
            dataset: Arc::new(dataset),
            settings,
            dispatcher,
        }
    }

    /// Control values the page starts with.
    pub fn initial_inputs(&self) -> DashboardInputs {
        DashboardInputs::initial(&self.dataset, &self.settings)
    }

    /// Dropdown entries: "All Sites" first, then every site in dataset order.
    pub fn site_options(&self) -> Vec<SiteOption> {
        std::iter::once(SiteOption {
            label: "All Sites".to_string(),
            value: ALL_SITES.to_string(),
        })
        .chain(self.dataset.sites().iter().map(|site| SiteOption {
            label: site.clone(),
            value: site.clone(),
        }))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteOption {
    pub label: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Per-request control values
// ---------------------------------------------------------------------------

/// Current value of every input control, sent by the page with each change.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardInputs {
    pub site: SiteSelection,
    pub payload: PayloadInterval,
}

impl DashboardInputs {
    /// All sites, and the payload range observed in the dataset. An empty
    /// dataset falls back to the slider's full domain.
    pub fn initial(dataset: &LaunchDataset, settings: &Settings) -> Self {
        Self {
            site: SiteSelection::All,
            payload: default_payload(dataset, settings),
        }
    }
}

pub fn default_payload(dataset: &LaunchDataset, settings: &Settings) -> PayloadInterval {
    let (lo, hi) = dataset
        .payload_bounds()
        .unwrap_or((settings.slider.min, settings.slider.max));
    // Bounds come from validated records or validated settings.
    PayloadInterval::new(lo, hi).unwrap_or_else(|err| {
        log::warn!("{err}, defaulting to [0, 0]");
        PayloadInterval::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LaunchRecord, Outcome};

    #[test]
    fn options_start_with_all_sites() {
        let ds = LaunchDataset::from_records(vec![
            LaunchRecord::new("CCAFS LC-40", 0.0, Outcome::Failure, "v1.0"),
            LaunchRecord::new("VAFB SLC-4E", 500.0, Outcome::Success, "v1.1"),
            LaunchRecord::new("CCAFS LC-40", 525.0, Outcome::Success, "v1.0"),
        ]);
        let state = AppState::new(ds, Settings::default());
        let values: Vec<String> = state.site_options().into_iter().map(|o| o.value).collect();
        assert_eq!(values, ["ALL", "CCAFS LC-40", "VAFB SLC-4E"]);
        assert_eq!(state.site_options()[0].label, "All Sites");

        let inputs = state.initial_inputs();
        assert_eq!(inputs.site, SiteSelection::All);
        assert_eq!((inputs.payload.lo(), inputs.payload.hi()), (0.0, 525.0));
    }

    #[test]
    fn empty_dataset_defaults_to_slider_domain() {
        let inputs = DashboardInputs::initial(&LaunchDataset::from_records(Vec::new()), &Settings::default());
        assert_eq!((inputs.payload.lo(), inputs.payload.hi()), (0.0, 10000.0));
    }
}
