mod helpers;
mod preflight;
