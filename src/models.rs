use clap::ValueEnum;
use serde::Deserialize;

/// Top-level views, one per tab. The original dashboard layout:
/// overview, rockets & launches, Starlink.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum View {
    Dashboard,
    Launches,
    Starlink,
}

impl View {
    pub const ALL: [View; 3] = [View::Dashboard, View::Launches, View::Starlink];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard [1]",
            View::Launches => "Rockets & Launches [2]",
            View::Starlink => "Starlink [3]",
        }
    }

    pub fn as_index(self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Launches => 1,
            View::Starlink => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.as_index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.as_index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Sidebar,
    LaunchList,
    Detail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Company {
    pub name: String,
    pub founder: String,
    pub founded: u32,
    pub employees: u32,
    pub vehicles: u32,
    pub launch_sites: u32,
    pub test_sites: u32,
    pub valuation: u64,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Launch {
    pub id: String,
    pub name: String,
    pub flight_number: u32,
    pub date_utc: String,
    pub success: Option<bool>,
    pub upcoming: bool,
    pub rocket: Option<String>,
    pub details: Option<String>,
}

impl Launch {
    pub fn status_label(&self) -> &'static str {
        if self.upcoming {
            return "upcoming";
        }
        match self.success {
            Some(true) => "success",
            Some(false) => "failure",
            None => "unknown",
        }
    }

    /// Multi-line summary used by the detail panel and the clipboard copy.
    pub fn summary(&self) -> String {
        format!(
            "{} (flight #{})\nDate: {}\nStatus: {}\n\n{}",
            self.name,
            self.flight_number,
            self.date_utc,
            self.status_label(),
            self.details
                .as_deref()
                .unwrap_or("No details available.")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rocket {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub active: bool,
    pub first_flight: String,
    pub success_rate_pct: f64,
    pub cost_per_launch: u64,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StarlinkSat {
    pub id: String,
    pub version: Option<String>,
    pub launch: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub height_km: Option<f64>,
    pub velocity_kms: Option<f64>,
    #[serde(rename = "spaceTrack")]
    pub space_track: SpaceTrack,
}

/// Subset of the space-track record attached to each satellite.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrack {
    #[serde(rename = "OBJECT_NAME")]
    pub object_name: Option<String>,
    #[serde(rename = "LAUNCH_DATE")]
    pub launch_date: Option<String>,
    #[serde(rename = "DECAYED")]
    pub decayed: Option<u8>,
    #[serde(rename = "DECAY_DATE")]
    pub decay_date: Option<String>,
}

/// One page of a `/query` endpoint response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Fetch results for the dashboard view, written by the spawned request task.
#[derive(Default)]
pub struct DashboardPanel {
    pub company: Option<Company>,
    pub latest: Option<Launch>,
    pub next: Option<Launch>,
    pub error: Option<String>,
    pub loaded: bool,
}

#[derive(Default)]
pub struct LaunchesPanel {
    pub rockets: Vec<Rocket>,
    pub launches: Option<Page<Launch>>,
    pub error: Option<String>,
    pub loaded: bool,
}

#[derive(Default)]
pub struct StarlinkPanel {
    pub sats: Option<Page<StarlinkSat>>,
    pub error: Option<String>,
    pub loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_decodes_the_query_envelope() {
        let raw = r#"{
            "docs": [{
                "id": "abc",
                "name": "CRS-20",
                "flight_number": 91,
                "date_utc": "2020-03-07T04:50:31.000Z",
                "success": true,
                "upcoming": false,
                "rocket": "falcon9",
                "details": null
            }],
            "totalDocs": 1,
            "limit": 100,
            "totalPages": 1,
            "page": 1,
            "pagingCounter": 1,
            "hasPrevPage": false,
            "hasNextPage": false,
            "prevPage": null,
            "nextPage": null
        }"#;

        let page: Page<Launch> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.total_docs, 1);
        assert!(!page.has_next_page);
        assert_eq!(page.docs[0].name, "CRS-20");
        assert_eq!(page.docs[0].status_label(), "success");
    }

    #[test]
    fn starlink_space_track_fields_decode_from_upper_case() {
        let raw = r#"{
            "id": "sat1",
            "version": "v1.0",
            "launch": "launch1",
            "longitude": 12.5,
            "latitude": -30.0,
            "height_km": 550.2,
            "velocity_kms": 7.6,
            "spaceTrack": {
                "OBJECT_NAME": "STARLINK-1234",
                "LAUNCH_DATE": "2020-01-07",
                "DECAYED": 0,
                "DECAY_DATE": null
            }
        }"#;

        let sat: StarlinkSat = serde_json::from_str(raw).unwrap();
        assert_eq!(sat.space_track.object_name.as_deref(), Some("STARLINK-1234"));
        assert_eq!(sat.space_track.decayed, Some(0));
    }

    #[test]
    fn summary_includes_name_status_and_details() {
        let launch = Launch {
            id: "abc".into(),
            name: "Starlink 4-2".into(),
            flight_number: 130,
            date_utc: "2021-11-13T12:19:00.000Z".into(),
            success: Some(false),
            upcoming: false,
            rocket: None,
            details: Some("Booster landing failed.".into()),
        };

        let summary = launch.summary();
        assert!(summary.contains("Starlink 4-2 (flight #130)"));
        assert!(summary.contains("Status: failure"));
        assert!(summary.contains("Booster landing failed."));
    }
}
