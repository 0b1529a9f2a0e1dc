//! OpenAPI documentation for the management API at `/admin/api/v1/*`.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered at `/admin/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::calendar;
use crate::db;
use crate::scan;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "assetctl",
        description = "Asset tracking: registry, custody, bookings calendar, QR-code batches and scan reconciliation."
    ),
    servers(
        (url = "/admin/api/v1", description = "Management API server")
    ),
    paths(
        api::handlers::dashboard::get_dashboard,
        api::handlers::assets::list_assets,
        api::handlers::assets::create_asset,
        api::handlers::assets::get_asset,
        api::handlers::assets::update_asset,
        api::handlers::assets::delete_asset,
        api::handlers::assets::assign_custody,
        api::handlers::assets::release_custody,
        api::handlers::assets::add_asset_to_booking,
        api::handlers::assets::refresh_asset_location,
        api::handlers::bookings::list_bookings,
        api::handlers::bookings::create_booking,
        api::handlers::bookings::get_booking,
        api::handlers::bookings::update_booking,
        api::handlers::bookings::delete_booking,
        api::handlers::calendar::get_month_view,
        api::handlers::calendar::layout_bookings,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::get_category,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
        api::handlers::locations::list_locations,
        api::handlers::locations::create_location,
        api::handlers::locations::get_location,
        api::handlers::locations::update_location,
        api::handlers::locations::delete_location,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::qr_codes::list_batches,
        api::handlers::qr_codes::create_batch,
        api::handlers::qr_codes::get_batch,
        api::handlers::qr_codes::list_codes,
        api::handlers::qr_codes::get_code,
        api::handlers::scan::submit_scan,
        api::handlers::scan::get_scan_options,
    ),
    components(
        schemas(
            // Assets
            api::models::assets::AssetCreate,
            api::models::assets::AssetUpdate,
            api::models::assets::AssetResponse,
            api::models::assets::AssetDetailResponse,
            api::models::assets::CustodyAssign,
            api::models::assets::BookingAssetAdd,
            api::models::assets::LocationRefresh,
            db::models::assets::GeoLocation,
            db::models::assets::ScanDetails,
            db::handlers::assets::AssetSortKey,
            db::handlers::assets::SortDirection,
            crate::types::AssetStatus,
            // Bookings and calendar
            api::models::bookings::BookingCreate,
            api::models::bookings::BookingUpdate,
            api::models::bookings::BookingResponse,
            api::models::bookings::BookingDetailResponse,
            db::handlers::bookings::BookingView,
            crate::types::BookingStatus,
            api::models::calendar::RawBooking,
            api::models::calendar::LayoutRequest,
            api::models::calendar::LayoutResponse,
            calendar::MonthView,
            calendar::DayCell,
            calendar::BookingBar,
            calendar::TrackAssignment,
            calendar::SkippedBooking,
            // Reference data
            api::models::categories::CategoryCreate,
            api::models::categories::CategoryUpdate,
            api::models::categories::CategoryResponse,
            api::models::locations::LocationCreate,
            api::models::locations::LocationUpdate,
            api::models::locations::LocationResponse,
            api::models::locations::LocationDetailResponse,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::dashboard::DashboardResponse,
            api::models::dashboard::StatusCount,
            api::models::dashboard::CategoryCount,
            // QR codes and scanning
            api::models::qr_codes::BatchCreate,
            api::models::qr_codes::QrBatchResponse,
            api::models::qr_codes::QrCodeEntry,
            api::models::qr_codes::QrCodeResponse,
            api::models::scan::ScanSubmission,
            api::models::scan::ScanResponse,
            scan::geolocation::GeolocationReport,
            scan::geolocation::GeolocationFailure,
            scan::geolocation::Position,
            scan::geolocation::PositionOptions,
        )
    ),
    tags(
        (name = "dashboard", description = "Summary counts"),
        (name = "assets", description = "Asset registry, custody and location"),
        (name = "bookings", description = "Asset bookings"),
        (name = "calendar", description = "Bookings calendar and track layout"),
        (name = "categories", description = "Asset categories"),
        (name = "locations", description = "Named locations"),
        (name = "users", description = "Custodians"),
        (name = "qr_codes", description = "QR-code batches and labels"),
        (name = "scan", description = "QR scan reconciliation"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/dashboard",
            "/assets",
            "/assets/{id}",
            "/assets/{id}/custody",
            "/assets/{id}/bookings",
            "/assets/{id}/location",
            "/bookings",
            "/bookings/{id}",
            "/calendar",
            "/calendar/layout",
            "/categories",
            "/categories/{id}",
            "/locations",
            "/locations/{id}",
            "/users",
            "/users/{id}",
            "/qr-batches",
            "/qr-batches/{id}",
            "/qr-codes",
            "/qr-codes/{id}",
            "/scan",
            "/scan/options",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is not documented");
        }
    }
}
