use std::fmt;
use std::time::Duration;

use error_stack::{report, ResultExt};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::Locator;
use tracing::{debug, instrument, trace};

use super::fantoccini_scraper_driver::FantocciniScraperDriver;
use super::listflex_selectors::{ListflexSelectors, LOGIN_PAGE};
use super::scraper_driver::ScraperDriverError;
use super::webdriver_extensions::{poll_until, WebDriverExt};
use crate::adapters::config::tenant_config::TenantConfig;
use crate::adapters::config::webdriver_config::WebDriverConfig;
use crate::ports::session_driver::{
    Credentials, SessionDriver, SessionError, SessionFactory, UiCandidate,
};

/// Browser session against one Listflex lmadmin tenant.
pub struct ListflexSession {
    driver: FantocciniScraperDriver,
    login_url: String,
    integrations_url: String,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl fmt::Debug for ListflexSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListflexSession")
            .field("integrations_url", &self.integrations_url)
            .finish()
    }
}

fn wait_error(error: &CmdError, what: &'static str) -> SessionError {
    match error {
        CmdError::WaitTimeout => SessionError::Timeout(what),
        error if error.is_miss() => SessionError::ElementNotFound(what),
        _ => SessionError::CommandFailed(what),
    }
}

/// A box without a title or edit button is not an integration; anything else
/// (stale element, lost session) is a real failure.
fn skip_box_on_miss<T>(
    lookup: Result<T, CmdError>,
    position: usize,
) -> error_stack::Result<Option<T>, SessionError> {
    match lookup {
        Ok(found) => Ok(Some(found)),
        Err(error) if error.is_miss() => {
            trace!(position, "Skipping integration box: {}", error);
            Ok(None)
        }
        Err(error) => Err(report!(SessionError::CommandFailed("integration box")))
            .attach_printable_lazy(|| format!("Box #{}: {}", position, error)),
    }
}

impl ListflexSession {
    #[instrument(name = "ListflexSession::new", skip_all)]
    pub async fn new(
        webdriver: &WebDriverConfig,
        tenant: &TenantConfig,
    ) -> error_stack::Result<Self, ScraperDriverError> {
        Ok(Self {
            driver: FantocciniScraperDriver::new(webdriver).await?,
            login_url: tenant.login_url(),
            integrations_url: tenant.integrations_url(),
            wait_timeout: webdriver.wait_timeout(),
            poll_interval: webdriver.poll_interval(),
        })
    }

    async fn wait_for(
        &self,
        locator: Locator<'_>,
        what: &'static str,
    ) -> error_stack::Result<Element, SessionError> {
        self.driver
            .client
            .wait()
            .at_most(self.wait_timeout)
            .every(self.poll_interval)
            .for_element(locator)
            .await
            .map_err(|error| {
                let context = wait_error(&error, what);
                report!(context).attach_printable(error.to_string())
            })
    }

    async fn wait_for_page_load(&self, what: &'static str) -> error_stack::Result<(), SessionError> {
        let client = &self.driver.client;
        let loaded = poll_until(self.wait_timeout, self.poll_interval, move || async move {
            matches!(client.ready_state().await.as_deref(), Ok("complete"))
        })
        .await;

        if loaded {
            Ok(())
        } else {
            Err(report!(SessionError::Timeout(what)))
        }
    }

    async fn goto(&self, url: &str) -> error_stack::Result<(), SessionError> {
        debug!(url, "Navigating");
        self.driver
            .client
            .goto(url)
            .await
            .change_context_lazy(|| SessionError::NavigationFailed(url.to_owned()))?;
        self.wait_for_page_load("page load")
            .await
            .change_context_lazy(|| SessionError::NavigationFailed(url.to_owned()))
    }

    async fn candidate_from_box(&self, integration_box: &Element) -> Result<UiCandidate<Element>, CmdError> {
        let title = integration_box
            .find(Locator::Css(ListflexSelectors::INTEGRATION_TITLE))
            .await?
            .text()
            .await?
            .trim()
            .to_owned();

        let edit_button = integration_box
            .find(Locator::Css(ListflexSelectors::EDIT_BUTTON))
            .await?;

        Ok(UiCandidate {
            title,
            handle: edit_button,
        })
    }
}

#[async_trait::async_trait]
impl SessionDriver for ListflexSession {
    type Handle = Element;

    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn authenticate(&self, credentials: &Credentials) -> error_stack::Result<(), SessionError> {
        self.goto(&self.login_url)
            .await
            .change_context(SessionError::AuthenticationFailed)?;

        self.wait_for(Locator::Css(ListflexSelectors::USERNAME_INPUT), "username input")
            .await
            .change_context(SessionError::AuthenticationFailed)?
            .send_keys(&credentials.username)
            .await
            .change_context(SessionError::AuthenticationFailed)?;

        self.wait_for(Locator::Css(ListflexSelectors::PASSWORD_INPUT), "password input")
            .await
            .change_context(SessionError::AuthenticationFailed)?
            .send_keys(&credentials.password)
            .await
            .change_context(SessionError::AuthenticationFailed)?;

        self.wait_for(Locator::Css(ListflexSelectors::LOGIN_BUTTON), "login button")
            .await
            .change_context(SessionError::AuthenticationFailed)?
            .click()
            .await
            .change_context(SessionError::AuthenticationFailed)?;

        let client = &self.driver.client;
        let left_login_page = poll_until(self.wait_timeout, self.poll_interval, move || async move {
            client
                .current_url()
                .await
                .map(|url| !url.path().contains(LOGIN_PAGE))
                .unwrap_or(false)
        })
        .await;

        if !left_login_page {
            return Err(report!(SessionError::AuthenticationFailed))
                .attach_printable("Still on the login page, check the tenant credentials");
        }

        debug!("Logged in");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn open_integrations(&self) -> error_stack::Result<(), SessionError> {
        self.goto(&self.integrations_url).await?;

        let url = self
            .driver
            .client
            .current_url()
            .await
            .change_context(SessionError::CommandFailed("current url"))?;
        if url.path().contains(LOGIN_PAGE) {
            return Err(report!(SessionError::SessionExpired))
                .attach_printable_lazy(|| format!("Landed on {}", url));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_candidates(&self) -> error_stack::Result<Vec<UiCandidate<Element>>, SessionError> {
        // An empty listing is a page without boxes, not a lookup error
        let boxes = self
            .driver
            .client
            .find_all(Locator::Css(ListflexSelectors::INTEGRATION_BOX))
            .await
            .change_context(SessionError::CommandFailed("integration list"))?;

        let mut candidates = Vec::with_capacity(boxes.len());
        for (position, integration_box) in boxes.iter().enumerate() {
            if let Some(candidate) =
                skip_box_on_miss(self.candidate_from_box(integration_box).await, position)?
            {
                candidates.push(candidate);
            }
        }

        debug!(count = candidates.len(), "Listed integrations");
        Ok(candidates)
    }

    #[instrument(skip_all)]
    async fn select(&self, handle: &Element) -> error_stack::Result<(), SessionError> {
        let client = &self.driver.client;
        client
            .scroll_into_view(handle)
            .await
            .change_context(SessionError::ElementNotFound("edit button"))?;
        client
            .js_click(handle)
            .await
            .change_context(SessionError::ElementNotFound("edit button"))?;

        self.wait_for_page_load("edit form").await
    }

    #[instrument(skip(self))]
    async fn read_field_value(&self, field_id: &str) -> error_stack::Result<String, SessionError> {
        let field = self
            .wait_for(Locator::Id(field_id), "form field")
            .await
            .attach_printable_lazy(|| format!("Field #{}", field_id))?;

        let value = field
            .prop("value")
            .await
            .change_context_lazy(|| SessionError::FieldAccessFailed(field_id.to_owned()))?;

        Ok(value.unwrap_or_default())
    }

    #[instrument(skip(self, value))]
    async fn write_field_value(
        &self,
        field_id: &str,
        value: &str,
    ) -> error_stack::Result<(), SessionError> {
        let field = self
            .wait_for(Locator::Id(field_id), "form field")
            .await
            .attach_printable_lazy(|| format!("Field #{}", field_id))?;

        field
            .clear()
            .await
            .change_context_lazy(|| SessionError::FieldAccessFailed(field_id.to_owned()))?;
        field
            .send_keys(value)
            .await
            .change_context_lazy(|| SessionError::FieldAccessFailed(field_id.to_owned()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn submit(&self) -> error_stack::Result<(), SessionError> {
        let save_button = self
            .wait_for(Locator::Css(ListflexSelectors::SAVE_BUTTON), "save button")
            .await
            .change_context(SessionError::SubmissionFailed)?;

        self.driver
            .client
            .js_click(&save_button)
            .await
            .change_context(SessionError::SubmissionFailed)?;

        self.wait_for_page_load("save")
            .await
            .change_context(SessionError::SubmissionFailed)
    }

    async fn close(&self) {
        self.driver.close().await;
    }
}

/// Launches a [`ListflexSession`] for one tenant.
#[derive(Debug, Clone)]
pub struct ListflexSessionFactory {
    webdriver: WebDriverConfig,
    tenant: TenantConfig,
}

impl ListflexSessionFactory {
    pub fn new(webdriver: WebDriverConfig, tenant: TenantConfig) -> Self {
        Self { webdriver, tenant }
    }
}

#[async_trait::async_trait]
impl SessionFactory for ListflexSessionFactory {
    type Driver = ListflexSession;

    #[instrument(skip(self))]
    async fn open(&self) -> error_stack::Result<ListflexSession, SessionError> {
        ListflexSession::new(&self.webdriver, &self.tenant)
            .await
            .change_context(SessionError::DriverUnavailable)
    }
}
