use crate::{
    api::{self, attendance, dashboard, employee},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::Condition, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build the per-IP limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond((60_000 / requests_per_min as u64).max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap_or_default();
        Governor::new(&cfg)
    }

    let api_limiter = Condition::new(
        config.rate_api_per_min > 0,
        build_limiter(config.rate_api_per_min),
    );

    cfg.app_data(api::json_config());

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/simple, ahead of /{id}
                    .service(
                        web::resource("/simple")
                            .route(web::get().to(employee::list_employees_simple)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::patch().to(employee::partial_update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employees/{id}/attendance-summary
                    .service(
                        web::resource("/{id}/attendance-summary")
                            .route(web::get().to(employee::employee_attendance_summary)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::create_attendance)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_attendance))
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::patch().to(attendance::partial_update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::resource("/dashboard").route(web::get().to(dashboard::dashboard_summary)),
            ),
    );
}
