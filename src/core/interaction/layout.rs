//=========================================================================
// Café Layout
//=========================================================================
//
// Fixed floor plan: computer stations, the cashier desk and the
// leaderboard kiosk. Occupancy is static demo data.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;

//=== StationState ========================================================

pub type StationId = u32;

/// One clickable computer terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct StationState {
    pub id: StationId,
    pub position: Vec3,
    pub occupied: bool,
    pub occupant_label: Option<String>,
}

impl StationState {
    pub fn free(id: StationId, position: Vec3) -> Self {
        Self {
            id,
            position,
            occupied: false,
            occupant_label: None,
        }
    }

    pub fn occupied_by(id: StationId, position: Vec3, label: &str) -> Self {
        Self {
            id,
            position,
            occupied: true,
            occupant_label: Some(label.to_string()),
        }
    }
}

//=== CafeLayout ==========================================================

/// Station set plus the two fixed points of interest on the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct CafeLayout {
    stations: Vec<StationState>,
    pub cashier: Vec3,
    pub cashier_name: String,
    pub leaderboard_kiosk: Vec3,
}

impl CafeLayout {
    /// Builds a layout from an explicit station list.
    pub fn new(stations: Vec<StationState>, cashier: Vec3, leaderboard_kiosk: Vec3) -> Self {
        Self {
            stations,
            cashier,
            cashier_name: String::from("Alex Chen"),
            leaderboard_kiosk,
        }
    }

    /// Three rows of five stations with five regulars already seated.
    pub fn standard() -> Self {
        const ROWS_X: [f32; 3] = [0.0, 4.0, 8.0];
        const SEATS_Z: [f32; 5] = [-4.0, -2.0, 0.0, 2.0, 4.0];
        const REGULARS: [(StationId, &str); 5] = [
            (2, "gamer_123"),
            (4, "retro_player"),
            (6, "cyber_ninja"),
            (10, "pro_gamer"),
            (13, "streamer_x"),
        ];

        let mut stations = Vec::with_capacity(ROWS_X.len() * SEATS_Z.len());
        for (row, x) in ROWS_X.iter().enumerate() {
            for (seat, z) in SEATS_Z.iter().enumerate() {
                let id = (row * SEATS_Z.len() + seat + 1) as StationId;
                let position = Vec3::new(*x, 0.0, *z);
                let station = match REGULARS.iter().find(|(regular, _)| *regular == id) {
                    Some((_, label)) => StationState::occupied_by(id, position, label),
                    None => StationState::free(id, position),
                };
                stations.push(station);
            }
        }

        Self::new(stations, Vec3::new(-6.0, 0.0, 4.0), Vec3::new(-8.0, 0.0, -6.0))
    }

    //--- Query API --------------------------------------------------------

    pub fn station(&self, id: StationId) -> Option<&StationState> {
        self.stations.iter().find(|station| station.id == id)
    }

    pub fn stations(&self) -> &[StationState] {
        &self.stations
    }

    pub fn free_stations(&self) -> impl Iterator<Item = &StationState> {
        self.stations.iter().filter(|station| !station.occupied)
    }
}

impl Default for CafeLayout {
    fn default() -> Self {
        Self::standard()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_has_fifteen_stations() {
        let layout = CafeLayout::standard();
        assert_eq!(layout.stations().len(), 15);
        assert_eq!(layout.free_stations().count(), 10);
    }

    #[test]
    fn regulars_sit_at_their_stations() {
        let layout = CafeLayout::standard();

        let station = layout.station(13).unwrap();
        assert!(station.occupied);
        assert_eq!(station.occupant_label.as_deref(), Some("streamer_x"));
        assert_eq!(station.position, Vec3::new(8.0, 0.0, 0.0));

        let station = layout.station(1).unwrap();
        assert!(!station.occupied);
        assert_eq!(station.position, Vec3::new(0.0, 0.0, -4.0));
    }

    #[test]
    fn unknown_station_is_none() {
        assert!(CafeLayout::standard().station(99).is_none());
    }
}
