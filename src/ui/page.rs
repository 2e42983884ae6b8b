use serde::Serialize;

use crate::config::SliderDomain;
use crate::data::filter::{PayloadInterval, SiteSelection};
use crate::state::{AppState, SiteOption};

pub const PAGE_TITLE: &str = "SpaceX Launch Records Dashboard";

// ---------------------------------------------------------------------------
// Layout description served to the page
// ---------------------------------------------------------------------------

/// Control options and defaults the page needs to build itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub title: &'static str,
    pub site_options: Vec<SiteOption>,
    pub default_site: SiteSelection,
    pub slider: SliderLayout,
    pub default_payload: PayloadInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderLayout {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    pub value: f64,
    pub label: String,
}

impl SliderLayout {
    pub fn new(domain: &SliderDomain) -> Self {
        let marks = domain
            .marks()
            .into_iter()
            .map(|value| Mark {
                value,
                label: format!("{value} kg"),
            })
            .collect();
        SliderLayout {
            min: domain.min,
            max: domain.max,
            step: domain.step,
            marks,
        }
    }
}

impl DashboardLayout {
    pub fn new(state: &AppState) -> Self {
        let inputs = state.initial_inputs();
        DashboardLayout {
            title: PAGE_TITLE,
            site_options: state.site_options(),
            default_site: inputs.site,
            slider: SliderLayout::new(&state.settings.slider),
            default_payload: inputs.payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Static page
// ---------------------------------------------------------------------------

/// The dashboard page. Controls are populated from `/api/layout`; every
/// control change posts to `/api/update` and redraws the returned figures.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SpaceX Launch Records Dashboard</title>
    <script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
    <style>
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px;
            background: #f5f5f5;
        }
        h1 { text-align: center; color: #503D36; font-size: 40px; }
        .panel {
            background: white;
            padding: 15px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        select, input[type=search] {
            width: 100%;
            padding: 8px;
            border: 1px solid #ddd;
            border-radius: 4px;
            font-size: 14px;
        }
        .slider { position: relative; height: 40px; }
        .slider input[type=range] {
            position: absolute;
            width: 100%;
            pointer-events: none;
            background: none;
        }
        .slider input[type=range]::-webkit-slider-thumb { pointer-events: all; }
        .slider input[type=range]::-moz-range-thumb { pointer-events: all; }
        .marks { display: flex; justify-content: space-between; font-size: 12px; color: #666; }
        .chart { height: 450px; }
        .status { color: #666; font-size: 14px; }
    </style>
</head>
<body>
    <h1 id="title">SpaceX Launch Records Dashboard</h1>

    <div class="panel">
        <input id="site-search" type="search" placeholder="Choose Launch Site">
        <select id="site-dropdown"></select>
    </div>

    <div class="panel"><div id="success-pie-chart" class="chart"></div></div>

    <div class="panel">
        <p>Payload range (Kg): <span id="payload-value"></span></p>
        <div class="slider">
            <input id="payload-lo" type="range">
            <input id="payload-hi" type="range">
        </div>
        <div class="marks" id="payload-marks"></div>
    </div>

    <div class="panel"><div id="success-payload-scatter-chart" class="chart"></div></div>

    <div class="status" id="status"></div>

    <script>
        let options = [];
        const inputs = { site: 'ALL', payload: [0, 0] };

        function showPayload() {
            document.getElementById('payload-value').textContent =
                `${inputs.payload[0]} – ${inputs.payload[1]} kg`;
        }

        // The current selection always stays listed, so the visible option
        // never drifts from the value sent to the server.
        function fillDropdown(filter) {
            const select = document.getElementById('site-dropdown');
            const needle = filter.toLowerCase();
            const shown = options.filter(o =>
                o.value === 'ALL' || o.value === inputs.site || o.label.toLowerCase().includes(needle));
            select.replaceChildren(...shown.map(o => {
                const option = document.createElement('option');
                option.value = o.value;
                option.textContent = o.label;
                option.selected = o.value === inputs.site;
                return option;
            }));
        }

        async function update(changed) {
            try {
                const response = await fetch('/api/update', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ changed, site: inputs.site, payload: inputs.payload }),
                });
                const body = await response.json();
                if (!response.ok) {
                    document.getElementById('status').textContent = 'Error: ' + body.error;
                    return;
                }
                for (const [id, figure] of Object.entries(body)) {
                    Plotly.react(id, figure.data, figure.layout, { responsive: true });
                }
                document.getElementById('status').textContent = '';
            } catch (err) {
                console.error('Error:', err);
                document.getElementById('status').textContent = 'Error: ' + err;
            }
        }

        function onSliderInput() {
            const lo = document.getElementById('payload-lo');
            const hi = document.getElementById('payload-hi');
            if (Number(lo.value) > Number(hi.value)) {
                if (this === lo) { hi.value = lo.value; } else { lo.value = hi.value; }
            }
            inputs.payload = [Number(lo.value), Number(hi.value)];
            showPayload();
        }

        async function init() {
            const layout = await (await fetch('/api/layout')).json();
            document.getElementById('title').textContent = layout.title;
            options = layout.site_options;
            inputs.site = layout.default_site;
            inputs.payload = layout.default_payload;
            fillDropdown('');
            showPayload();

            for (const id of ['payload-lo', 'payload-hi']) {
                const el = document.getElementById(id);
                el.min = layout.slider.min;
                el.max = layout.slider.max;
                el.step = layout.slider.step;
                el.addEventListener('input', onSliderInput);
                el.addEventListener('change', () => update('payload-slider'));
            }
            document.getElementById('payload-lo').value = inputs.payload[0];
            document.getElementById('payload-hi').value = inputs.payload[1];
            document.getElementById('payload-marks').replaceChildren(...layout.slider.marks.map(m => {
                const span = document.createElement('span');
                span.textContent = m.label;
                return span;
            }));

            document.getElementById('site-search').addEventListener('input', e => fillDropdown(e.target.value));
            document.getElementById('site-dropdown').addEventListener('change', e => {
                inputs.site = e.target.value;
                update('site-dropdown');
            });

            await update(null);
        }

        init();
    </script>
</body>
</html>
"##;
