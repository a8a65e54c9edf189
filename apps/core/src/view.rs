use crate::record::LookupRecord;

/// The four text slots next to the search form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPanel {
    pub ip: String,
    pub location: String,
    pub timezone: String,
    pub isp: String,
}

impl InfoPanel {
    /// Placeholder content shown before the first lookup resolves.
    pub fn skeleton() -> Self {
        Self {
            ip: "101.11.201.22".to_string(),
            location: "TW Taiwan".to_string(),
            timezone: "+08:00".to_string(),
            isp: "Taiwan Mobile Co., Ltd.".to_string(),
        }
    }

    pub fn render(&mut self, record: &LookupRecord) {
        self.ip.clone_from(&record.ip);
        self.location = record.location_label();
        self.timezone.clone_from(&record.timezone);
        self.isp.clone_from(&record.isp);
    }

    /// `(label, displayed value)` in screen order.
    pub fn rows(&self) -> [(&'static str, String); 4] {
        [
            ("IP Address", self.ip.clone()),
            ("Location", self.location.clone()),
            ("Timezone", format!("UTC {}", self.timezone)),
            ("ISP", self.isp.clone()),
        ]
    }
}

impl Default for InfoPanel {
    fn default() -> Self {
        Self::skeleton()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google() -> LookupRecord {
        LookupRecord {
            ip: "8.8.8.8".to_string(),
            country: "US".to_string(),
            region: "CA".to_string(),
            timezone: "UTC-08:00".to_string(),
            isp: "Google".to_string(),
            lat: 37.4,
            lng: -122.1,
        }
    }

    #[test]
    fn render_replaces_all_four_slots() {
        let mut panel = InfoPanel::skeleton();
        panel.render(&google());

        assert_eq!(panel.ip, "8.8.8.8");
        assert_eq!(panel.location, "US CA");
        assert_eq!(panel.timezone, "UTC-08:00");
        assert_eq!(panel.isp, "Google");
    }

    #[test]
    fn timezone_row_gets_utc_prefix() {
        let panel = InfoPanel::skeleton();
        let rows = panel.rows();
        assert_eq!(rows[2], ("Timezone", "UTC +08:00".to_string()));
        assert_eq!(rows[0].0, "IP Address");
    }
}
