use crate::handlers;
use crate::store::ConfigStore;
use axum::extract::FromRef;
use tower_cookies::CookieManagerLayer;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/config` and `/config/layout` for any state that can hand out a [`ConfigStore`].
///
/// Carries its own [`CookieManagerLayer`], so the cookie backend works wherever the router
/// is mounted.
pub fn settings_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    ConfigStore: FromRef<S>,
{
    OpenApiRouter::<S>::new()
        .routes(routes!(
            handlers::get_config,
            handlers::put_config,
            handlers::post_config,
            handlers::delete_config
        ))
        .routes(routes!(handlers::get_layout, handlers::put_layout))
        .layer(CookieManagerLayer::new())
}
