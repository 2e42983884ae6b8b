use std::collections::BTreeMap;

use serde::Serialize;

use crate::color::ColorMap;
use crate::data::filter::{PayloadScatter, ScatterPoint, SuccessBreakdown};
use crate::data::model::{COL_CLASS, COL_PAYLOAD_MASS};

// ---------------------------------------------------------------------------
// Plotly figure description
// ---------------------------------------------------------------------------

/// A figure as Plotly.js expects it: `{ data: [...traces], layout: {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie {
        labels: Vec<String>,
        values: Vec<u64>,
    },
    Scatter {
        name: String,
        mode: &'static str,
        x: Vec<f64>,
        y: Vec<u8>,
        customdata: Vec<String>,
        hovertemplate: String,
        marker: Marker,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Title { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: Title,
}

// ---------------------------------------------------------------------------
// Success pie chart
// ---------------------------------------------------------------------------

/// Pie chart of the success breakdown. An empty breakdown gives a figure
/// without traces, which Plotly draws as an empty chart.
pub fn success_pie(breakdown: &SuccessBreakdown) -> Figure {
    let data = if breakdown.slices.is_empty() {
        Vec::new()
    } else {
        vec![Trace::Pie {
            labels: breakdown.slices.iter().map(|s| s.label.clone()).collect(),
            values: breakdown.slices.iter().map(|s| s.count).collect(),
        }]
    };

    Figure {
        data,
        layout: Layout {
            title: Title::new(&breakdown.title),
            xaxis: None,
            yaxis: None,
            legend: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Payload / outcome scatter chart
// ---------------------------------------------------------------------------

/// Scatter chart with one trace per booster category, coloured by `colors`.
pub fn payload_scatter(scatter: &PayloadScatter, colors: &ColorMap) -> Figure {
    let mut groups: BTreeMap<&str, Vec<&ScatterPoint>> = BTreeMap::new();
    for p in &scatter.points {
        groups
            .entry(p.booster_version_category.as_str())
            .or_default()
            .push(p);
    }

    let data = groups
        .into_iter()
        .map(|(category, points)| Trace::Scatter {
            name: category.to_string(),
            mode: "markers",
            x: points.iter().map(|p| p.payload_mass_kg).collect(),
            y: points.iter().map(|p| p.class).collect(),
            customdata: points.iter().map(|p| p.launch_site.clone()).collect(),
            hovertemplate: format!(
                "{COL_PAYLOAD_MASS}=%{{x}}<br>{COL_CLASS}=%{{y}}<br>Launch Site=%{{customdata}}<extra>{category}</extra>"
            ),
            marker: Marker {
                color: colors.color_for(category).to_string(),
                size: 10,
            },
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Title::new(&scatter.title),
            xaxis: Some(Axis {
                title: Title::new(COL_PAYLOAD_MASS),
            }),
            yaxis: Some(Axis {
                title: Title::new(COL_CLASS),
            }),
            legend: Some(Legend {
                title: Title::new(&colors.column),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::color::DEFAULT_COLOR;
    use crate::data::filter::Slice;
    use crate::data::model::COL_BOOSTER_CATEGORY;

    fn point(payload: f64, class: u8, site: &str, booster: &str) -> ScatterPoint {
        ScatterPoint {
            payload_mass_kg: payload,
            class,
            launch_site: site.into(),
            booster_version_category: booster.into(),
        }
    }

    #[test]
    fn pie_figure_serializes_for_plotly() {
        let breakdown = SuccessBreakdown {
            title: "Total Success Launches by Site".into(),
            slices: vec![
                Slice { label: "A".into(), count: 1 },
                Slice { label: "B".into(), count: 0 },
            ],
        };
        let value = serde_json::to_value(success_pie(&breakdown)).unwrap();
        assert_eq!(
            value,
            json!({
                "data": [{ "type": "pie", "labels": ["A", "B"], "values": [1, 0] }],
                "layout": { "title": { "text": "Total Success Launches by Site" } }
            })
        );
    }

    #[test]
    fn empty_breakdown_has_no_traces() {
        let breakdown = SuccessBreakdown {
            title: "Total Success Launches for site X".into(),
            slices: Vec::new(),
        };
        assert!(success_pie(&breakdown).data.is_empty());
    }

    #[test]
    fn scatter_groups_points_by_booster_category() {
        let scatter = PayloadScatter {
            title: "Correlation between Payload and Success for all Sites".into(),
            points: vec![
                point(500.0, 0, "VAFB SLC-4E", "v1.1"),
                point(2490.0, 1, "KSC LC-39A", "FT"),
                point(5300.0, 1, "KSC LC-39A", "FT"),
            ],
        };
        let cats: BTreeSet<String> = ["FT", "v1.1"].iter().map(|s| s.to_string()).collect();
        let colors = ColorMap::new(COL_BOOSTER_CATEGORY, &cats);
        let fig = payload_scatter(&scatter, &colors);

        assert_eq!(fig.data.len(), 2);
        match &fig.data[0] {
            Trace::Scatter { name, x, y, customdata, marker, .. } => {
                assert_eq!(name, "FT");
                assert_eq!(x, &[2490.0, 5300.0]);
                assert_eq!(y, &[1, 1]);
                assert_eq!(customdata, &["KSC LC-39A", "KSC LC-39A"]);
                assert_eq!(marker.color, colors.color_for("FT"));
            }
            other => panic!("expected scatter trace, got {other:?}"),
        }

        let value = serde_json::to_value(&fig).unwrap();
        assert_eq!(value["data"][1]["type"], "scatter");
        assert_eq!(value["data"][1]["mode"], "markers");
        assert_eq!(value["layout"]["xaxis"]["title"]["text"], COL_PAYLOAD_MASS);
        assert_eq!(value["layout"]["legend"]["title"]["text"], COL_BOOSTER_CATEGORY);
    }

    #[test]
    fn empty_scatter_keeps_title_and_axes() {
        let scatter = PayloadScatter {
            title: "Correlation between Payload and Success by A".into(),
            points: Vec::new(),
        };
        let fig = payload_scatter(&scatter, &ColorMap::new(COL_BOOSTER_CATEGORY, &BTreeSet::new()));
        assert!(fig.data.is_empty());
        assert_eq!(fig.layout.title.text, scatter.title);
        assert!(fig.layout.yaxis.is_some());
    }

    #[test]
    fn blank_booster_points_form_a_grey_trace() {
        let scatter = PayloadScatter {
            title: "Correlation between Payload and Success for all Sites".into(),
            points: vec![
                point(500.0, 1, "CCAFS LC-40", ""),
                point(2490.0, 1, "KSC LC-39A", "FT"),
            ],
        };
        let cats: BTreeSet<String> = ["", "FT"].iter().map(|s| s.to_string()).collect();
        let fig = payload_scatter(&scatter, &ColorMap::new(COL_BOOSTER_CATEGORY, &cats));

        assert_eq!(fig.data.len(), 2);
        match &fig.data[0] {
            Trace::Scatter { name, marker, .. } => {
                assert_eq!(name, "");
                assert_eq!(marker.color, DEFAULT_COLOR);
            }
            other => panic!("expected scatter trace, got {other:?}"),
        }
        match &fig.data[1] {
            Trace::Scatter { marker, .. } => assert_ne!(marker.color, DEFAULT_COLOR),
            other => panic!("expected scatter trace, got {other:?}"),
        }
    }
}
