//! `DirectoryPage` nad sdíleným Chrome tabem.
//! Elementy se po každém kliknutí hledají znovu (re-render zneplatní remote object id).

use anyhow::{Context, Result};
use async_trait::async_trait;
use club_crawler::ChromeSession;
use headless_chrome::{Element, Tab};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::time::sleep;

use crate::driver::DirectoryPage;
use crate::parse::DirectorySelectors;

pub struct ChromeDirectoryPage {
    session: ChromeSession,
    selectors: DirectorySelectors,
    expand_settle: Duration,
}

impl ChromeDirectoryPage {
    pub fn new(session: ChromeSession, selectors: DirectorySelectors, expand_settle: Duration) -> Self {
        Self { session, selectors, expand_settle }
    }

    /// Spustí blokující práci s tabem na blocking poolu
    async fn with_tab<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Tab>, DirectorySelectors) -> Result<T> + Send + 'static,
    {
        let tab = self.session.tab();
        let selectors = self.selectors.clone();
        task::spawn_blocking(move || f(tab, selectors))
            .await
            .context("browser task failed")?
    }
}

fn offering_element<'a>(
    tab: &'a Tab,
    s: &DirectorySelectors,
    card: usize,
    offering: usize,
) -> Result<Element<'a>> {
    let mut cards = tab.find_elements(&s.card).context("club cards not found")?;
    if card >= cards.len() {
        anyhow::bail!("card {card} out of range ({} cards)", cards.len());
    }
    let card_el = cards.swap_remove(card);
    let mut offerings = card_el
        .find_elements(&s.offering)
        .context("offering controls not found")?;
    if offering >= offerings.len() {
        anyhow::bail!("offering {offering} out of range ({} offerings)", offerings.len());
    }
    Ok(offerings.swap_remove(offering))
}

fn click_offering_header(tab: &Tab, s: &DirectorySelectors, card: usize, offering: usize) -> Result<()> {
    let offering_el = offering_element(tab, s, card, offering)?;
    let header = offering_el
        .find_element(&s.offering_header)
        .context("offering header not found")?;
    header.click().context("offering click failed")?;
    Ok(())
}

#[async_trait]
impl DirectoryPage for ChromeDirectoryPage {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.session.navigate(url).await
    }

    async fn page_html(&mut self) -> Result<String> {
        Ok(self.session.snapshot().await?.html)
    }

    async fn wait_for_cards(&mut self) -> Result<()> {
        self.with_tab(|tab, s| {
            tab.wait_for_element(&s.card).context("club cards did not render")?;
            Ok(())
        })
        .await
    }

    async fn cards(&mut self) -> Result<Vec<String>> {
        self.with_tab(|tab, s| {
            let cards = tab.find_elements(&s.card).context("club cards not found")?;
            let mut out = Vec::with_capacity(cards.len());
            for card in &cards {
                out.push(card.get_content().context("failed to read card HTML")?);
            }
            Ok(out)
        })
        .await
    }

    async fn expand_offering(&mut self, card: usize, offering: usize) -> Result<String> {
        self.with_tab(move |tab, s| click_offering_header(&tab, &s, card, offering))
            .await?;

        sleep(self.expand_settle).await;

        self.with_tab(move |tab, s| {
            let offering_el = offering_element(&tab, &s, card, offering)?;
            let html = offering_el.get_content().context("failed to read revealed offering")?;
            Ok(html)
        })
        .await
    }

    async fn collapse_offering(&mut self, card: usize, offering: usize) -> Result<()> {
        self.with_tab(move |tab, s| click_offering_header(&tab, &s, card, offering))
            .await
    }

    async fn goto_page(&mut self, page: usize) -> Result<bool> {
        let clicked = self
            .with_tab(move |tab, s| {
                let links = match tab.find_elements(&s.page_link) {
                    Ok(links) => links,
                    Err(_) => return Ok(false),
                };
                let wanted = page.to_string();
                for link in links {
                    let text = link.get_inner_text().unwrap_or_default();
                    if text.trim() == wanted {
                        link.click().context("pagination click failed")?;
                        return Ok(true);
                    }
                }
                Ok(false)
            })
            .await?;

        if clicked {
            sleep(self.session.settle()).await;
        }
        Ok(clicked)
    }

    async fn next_page(&mut self) -> Result<bool> {
        let clicked = self
            .with_tab(|tab, s| {
                let Ok(next) = tab.find_element(&s.next) else { return Ok(false) };
                next.click().context("next click failed")?;
                Ok(true)
            })
            .await?;

        if clicked {
            sleep(self.session.settle()).await;
        }
        Ok(clicked)
    }
}
