use std::sync::Arc;

use tracing::info;
use xwanai::api::{self, app_state::AppState};
use xwanai::config::loader::ConfigLoader;
use xwanai::llm::create_generation_service;
use xwanai::observability::{
    ObservabilityState, create_observability_router, metrics_middleware,
};
use xwanai::security::auth::SupabaseAuthProvider;
use xwanai::services::{
    create_character_service, create_chat_service, create_profile_service,
};
use xwanai::storage::repository::{
    SupabaseCharacterRepository, SupabaseConversationRepository, SupabaseMessageRepository,
    SupabaseProfileRepository, SupabaseUserRepository,
};
use xwanai::storage::supabase::SupabaseClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    info!("Starting XwanAI...");

    let config = ConfigLoader::load()?;
    ConfigLoader::validate(&config)?;
    info!("Configuration loaded successfully");

    let supabase = SupabaseClient::new(config.supabase.clone())?;
    info!("Supabase client initialized");

    let user_repository = SupabaseUserRepository::new(supabase.clone());
    let profile_repository = Arc::new(SupabaseProfileRepository::new(supabase.clone()));
    let character_repository = Arc::new(SupabaseCharacterRepository::new(supabase.clone()));
    let conversation_repository = Arc::new(SupabaseConversationRepository::new(supabase.clone()));
    let message_repository = Arc::new(SupabaseMessageRepository::new(supabase.clone()));
    info!("Repositories initialized");

    let generation_service = create_generation_service(config.generation.clone())?;
    let generation: Arc<dyn xwanai::llm::GenerationService> = Arc::from(generation_service);
    info!(
        "Generation client initialized: {} ({})",
        config.generation.model, config.generation.base_url
    );

    let profile_service = create_profile_service(profile_repository.clone());
    info!("Profile service initialized");

    let character_service =
        create_character_service(character_repository.clone(), generation.clone());
    info!("Character service initialized");

    let chat_service = create_chat_service(
        character_repository.clone(),
        conversation_repository.clone(),
        message_repository.clone(),
        generation.clone(),
    );
    info!("Chat service initialized");

    let auth_provider = SupabaseAuthProvider::new(Arc::new(supabase.clone()));

    let app_state = AppState::new(
        supabase,
        Box::new(user_repository),
        profile_service,
        character_service,
        chat_service,
        Box::new(auth_provider),
    );
    info!("Application state created");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
    ));
    let api_router = api::create_router(app_state, &config.security.cors_origins);
    let metrics_state = observability_state.clone();
    let router = create_observability_router(observability_state)
        .merge(api_router)
        .layer(axum::middleware::from_fn(move |req, next| {
            let state = metrics_state.clone();
            metrics_middleware(req, next, state)
        }));
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
