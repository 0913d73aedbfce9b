use fleetme_store::SqliteFleetStore;

pub struct AppState {
    pub store: SqliteFleetStore,
}
