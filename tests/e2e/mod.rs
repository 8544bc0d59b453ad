// End-to-end tests for the VoiceGen HTTP API and generation pipeline
//
// The HTTP suites run the real router, queue, worker and provider clients.
// Provider traffic goes to a per-test mockito server and records live in an
// in-memory store, so these need no external services.
//
// test_repository exercises the Postgres store against a shared
// testcontainers instance; those tests are ignored unless Docker is present
// (`cargo test -- --ignored`).

mod test_generations;
