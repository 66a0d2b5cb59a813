//! Onboarding overlays that block the landing page

use std::time::Duration;

use tracing::{debug, info};

use crate::error::ScraperError;
use crate::traits::{PageDriver, Target};

use super::profile::SiteProfile;
use super::types::ObstacleOutcome;

/// Accept the cookie banner. The banner is mandatory: a timeout fails the run.
pub async fn dismiss_cookie_banner(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    timeout: Duration,
) -> Result<(), ScraperError> {
    info!("Clicking cookie banner button...");
    page.wait_for(&profile.cookie_button, timeout).await?;
    page.click(&profile.cookie_button).await?;
    info!("Cookie banner dismissed");
    Ok(())
}

/// Close the sign-in prompt if it shows up. Never fails.
pub async fn dismiss_signin_overlay(
    page: &dyn PageDriver,
    profile: &SiteProfile,
    appear_timeout: Duration,
    close_timeout: Duration,
) -> ObstacleOutcome {
    info!("Looking for sign-in iframe (waiting up to {:?})...", appear_timeout);

    let frame: Target = profile.signin_frame();
    match page.wait_for(&frame, appear_timeout).await {
        Ok(()) => {}
        Err(e) if e.is_timeout() => {
            info!("No sign-in overlay, continuing");
            return ObstacleOutcome::NotPresent;
        }
        Err(e) => {
            debug!("Sign-in overlay lookup failed: {}", e);
            return ObstacleOutcome::DismissFailed(e.to_string());
        }
    }

    match page
        .click_in_frame(&profile.signin_frame_src, &profile.signin_close, close_timeout)
        .await
    {
        Ok(()) => {
            info!("Sign-in overlay closed");
            ObstacleOutcome::Dismissed
        }
        Err(e) => {
            info!("Could not close sign-in overlay ({}), continuing", e);
            ObstacleOutcome::DismissFailed(e.to_string())
        }
    }
}
