// End-to-end tests for the pdf2tts HTTP service
//
// Each test gets its own server on an ephemeral port, its own temporary
// staging root and an in-memory speech engine, so tests run in parallel
// without sharing any filesystem state.
//
// PDFs are generated on the fly with lopdf; the speech engine double
// returns a fixed MP3 frame per synthesized chunk.

mod test_health;
