/*!
 * Walkers that drive the pipeline over whole documents.
 *
 * Both walkers are strictly sequential: values are translated one at a time
 * in document order, which keeps memory writes and progress reports ordered.
 */

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::errors::TranslationError;
use super::bidi::BidiReshaper;
use super::core::TranslationPipeline;
use super::document::{Element, LineDocument, RawLine, TreeDocument};
use super::progress::ProgressReporter;

/// Attribute that is never translated
pub const ID_ATTRIBUTE: &str = "id";

/// Logical-order result and, when reordering is enabled, the visual-order one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutput<T> {
    pub logical: T,
    pub visual: Option<T>,
}

/// Translates documents through a pipeline
pub struct DocumentWalker<'a> {
    pipeline: &'a TranslationPipeline,
    reshaper: Option<&'a BidiReshaper>,
}

impl<'a> DocumentWalker<'a> {
    /// `reshaper` enables the visual-order output
    pub fn new(pipeline: &'a TranslationPipeline, reshaper: Option<&'a BidiReshaper>) -> Self {
        Self { pipeline, reshaper }
    }

    /// Translate every `key:value` line; other lines pass through
    pub async fn walk_lines(
        &self,
        document: &LineDocument,
        progress: &mut ProgressReporter,
    ) -> Result<WalkOutput<LineDocument>, TranslationError> {
        let total = document.len();
        let mut logical = Vec::with_capacity(total);
        let mut visual = self.reshaper.map(|_| Vec::with_capacity(total));

        for (index, line) in document.lines.iter().enumerate() {
            match line.split_pair() {
                None => {
                    logical.push(line.clone());
                    if let Some(visual) = visual.as_mut() {
                        visual.push(line.clone());
                    }
                }
                Some((key, value)) => {
                    let translated = self.pipeline.translate_text(value).await?;
                    if let (Some(visual), Some(reshaper)) = (visual.as_mut(), self.reshaper) {
                        visual.push(RawLine {
                            content: format!("{}:{}", key, reshaper.reshape_for_display(&translated)),
                            terminator: line.terminator.clone(),
                        });
                    }
                    logical.push(RawLine {
                        content: format!("{}:{}", key, translated),
                        terminator: line.terminator.clone(),
                    });
                }
            }
            progress.report(index + 1, total);
        }

        if total == 0 {
            progress.finish();
        }

        Ok(WalkOutput {
            logical: LineDocument { lines: logical },
            visual: visual.map(|lines| LineDocument { lines }),
        })
    }

    /// Translate element text and attributes in pre-order.
    ///
    /// With reordering enabled the visual tree is produced by a second pass
    /// over a fresh copy of the input, so progress counts every element twice.
    pub async fn walk_tree(
        &self,
        document: &TreeDocument,
        progress: &mut ProgressReporter,
    ) -> Result<WalkOutput<TreeDocument>, TranslationError> {
        let per_pass = document.element_count();
        let passes = if self.reshaper.is_some() { 2 } else { 1 };
        let mut counter = TreeProgress {
            done: 0,
            total: per_pass * passes,
            reporter: progress,
        };

        let mut logical = document.clone();
        self.translate_element(&mut logical.root, None, &mut counter).await?;

        let visual = match self.reshaper {
            Some(reshaper) => {
                let mut visual = document.clone();
                self.translate_element(&mut visual.root, Some(reshaper), &mut counter)
                    .await?;
                Some(visual)
            }
            None => None,
        };

        Ok(WalkOutput { logical, visual })
    }

    fn translate_element<'b, 'r: 'b>(
        &'b self,
        element: &'b mut Element,
        reshaper: Option<&'b BidiReshaper>,
        counter: &'b mut TreeProgress<'r>,
    ) -> BoxFuture<'b, Result<(), TranslationError>> {
        async move {
            if let Some(text) = element.text.as_ref().filter(|t| !t.trim().is_empty()) {
                let translated = self.render(text, reshaper).await?;
                element.text = Some(translated);
            }

            for (name, value) in element.attributes.iter_mut() {
                if name == ID_ATTRIBUTE {
                    continue;
                }
                *value = self.render(value, reshaper).await?;
            }

            counter.advance();

            for child in element.children.iter_mut() {
                self.translate_element(child, reshaper, counter).await?;
            }
            Ok(())
        }
        .boxed()
    }

    /// Translate a value and, for the visual pass, reshape it
    async fn render(&self, text: &str, reshaper: Option<&BidiReshaper>) -> Result<String, TranslationError> {
        let translated = self.pipeline.translate_text(text).await?;
        Ok(match reshaper {
            Some(reshaper) => reshaper.reshape_for_display(&translated),
            None => translated,
        })
    }
}

/// Shared element counter across both tree passes
struct TreeProgress<'r> {
    done: usize,
    total: usize,
    reporter: &'r mut ProgressReporter,
}

impl TreeProgress<'_> {
    fn advance(&mut self) {
        self.done += 1;
        self.reporter.report(self.done, self.total);
    }
}
