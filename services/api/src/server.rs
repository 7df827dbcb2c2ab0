use crate::cli::ServeArgs;
use crate::demo::seed_demo_data;
use crate::infra::{
    AppState, InMemoryCharacterRepository, InMemoryCommentRepository, InMemoryProductRepository,
    InMemoryStudentRepository,
};
use crate::routes::{with_gradebook_routes, ApiServices};
use crate::sqlite::SqliteStudentRepository;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gradebook::auth::SessionAuthority;
use gradebook::characters::{CharacterService, CommentService};
use gradebook::config::AppConfig;
use gradebook::error::AppError;
use gradebook::grading::{GradeService, StudentRepository};
use gradebook::products::ProductService;
use gradebook::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let app = match config.database.path.clone() {
        Some(path) => {
            let repository = SqliteStudentRepository::open(&path)?;
            info!(path = %path.display(), "using sqlite student storage");
            build_app(&config, Arc::new(repository), args.seed_demo)?
        }
        None => {
            info!("using in-memory student storage");
            build_app(
                &config,
                Arc::new(InMemoryStudentRepository::default()),
                args.seed_demo,
            )?
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = app.layer(Extension(app_state)).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        all_years_teachers = config.grading.all_years_teachers,
        "gradebook service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app<S>(
    config: &AppConfig,
    students: Arc<S>,
    seed_demo: bool,
) -> Result<axum::Router, AppError>
where
    S: StudentRepository + 'static,
{
    let grades = Arc::new(
        GradeService::new(students, config.grading.engine)
            .with_bonus_policy(config.grading.all_years_teachers),
    );
    let character_repository = Arc::new(InMemoryCharacterRepository::default());
    let characters = Arc::new(CharacterService::new(character_repository.clone()));
    let comments = Arc::new(CommentService::new(
        Arc::new(InMemoryCommentRepository::default()),
        character_repository,
    ));
    let products = Arc::new(ProductService::new(Arc::new(
        InMemoryProductRepository::default(),
    )));

    if seed_demo {
        seed_demo_data(&*grades, &*characters, &*comments, &*products)?;
    }

    Ok(with_gradebook_routes(ApiServices {
        grades,
        characters,
        comments,
        products,
        authority: Arc::new(SessionAuthority::new(&config.auth)?),
    }))
}
