//! Embedded HTML/CSS/JS frontend for the codementor chat page.
//!
//! The entire page is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page chat HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>CodeMentor</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --user: #1f6feb;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
  height: 100vh;
}

/* Layout */
.app {
  display: grid;
  grid-template-columns: 260px 1fr;
  height: 100vh;
}

aside {
  background: var(--surface);
  border-right: 1px solid var(--border);
  padding: 20px 16px;
  overflow-y: auto;
  display: flex;
  flex-direction: column;
  gap: 20px;
}

aside h1 {
  font-size: 20px;
  font-weight: 600;
}

aside h2 {
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.06em;
  color: var(--text-muted);
  margin-bottom: 8px;
}

.subject-buttons { display: flex; gap: 8px; }
.subject-btn {
  flex: 1;
  padding: 8px;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: transparent;
  color: var(--text);
  cursor: pointer;
  font-size: 12px;
}
.subject-btn.active {
  background: var(--accent);
  border-color: var(--accent);
  color: #0d1117;
  font-weight: 600;
}

.topic-list { list-style: none; display: flex; flex-direction: column; gap: 4px; }
.topic-item {
  padding: 6px 10px;
  border-radius: var(--radius);
  cursor: pointer;
  color: var(--text-muted);
}
.topic-item:hover { background: var(--bg); color: var(--text); }

.key-panel { display: flex; flex-direction: column; gap: 8px; }
.key-status { display: flex; align-items: center; gap: 6px; font-size: 12px; }
.key-dot { width: 8px; height: 8px; border-radius: 50%; background: var(--red); }
.key-dot.ok { background: var(--green); }
.key-panel input {
  padding: 6px 8px;
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  font-family: var(--mono);
  font-size: 12px;
}
.row { display: flex; gap: 6px; }

.btn {
  padding: 6px 10px;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: var(--bg);
  color: var(--text);
  cursor: pointer;
  font-size: 12px;
}
.btn:hover { border-color: var(--accent); }
.btn.danger:hover { border-color: var(--red); color: var(--red); }

main {
  display: flex;
  flex-direction: column;
  min-height: 0;
}

.chat-header {
  padding: 14px 24px;
  border-bottom: 1px solid var(--border);
  display: flex;
  justify-content: space-between;
  align-items: center;
}
.chat-header .label { font-weight: 600; }
.chat-header .meta { color: var(--text-muted); font-size: 12px; }

/* Messages */
.messages {
  flex: 1;
  overflow-y: auto;
  padding: 24px;
  display: flex;
  flex-direction: column;
  gap: 16px;
}

.message { display: flex; gap: 12px; max-width: 820px; }
.user-message { align-self: flex-end; flex-direction: row-reverse; }
.message-avatar { font-size: 22px; line-height: 1; }
.message-content {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 10px 14px;
  min-width: 0;
}
.user-message .message-content { background: var(--user); border-color: var(--user); }
.welcome-message .message-content { border-color: var(--accent); }
.message-text code {
  font-family: var(--mono);
  background: var(--bg);
  padding: 1px 5px;
  border-radius: 4px;
  font-size: 13px;
}
.code-block {
  margin: 8px 0;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  overflow-x: auto;
}
.code-block pre { padding: 12px; }
.code-block code { background: none; padding: 0; }

.typing-indicator { display: flex; gap: 4px; padding: 4px 0; }
.typing-dot {
  width: 7px; height: 7px;
  border-radius: 50%;
  background: var(--text-muted);
  animation: blink 1.2s infinite ease-in-out;
}
.typing-dot:nth-child(2) { animation-delay: 0.2s; }
.typing-dot:nth-child(3) { animation-delay: 0.4s; }
@keyframes blink { 0%, 80%, 100% { opacity: 0.25; } 40% { opacity: 1; } }

/* Composer */
.hints {
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
  padding: 0 24px 10px;
}
.hint-chip {
  padding: 4px 10px;
  border: 1px solid var(--border);
  border-radius: 999px;
  background: transparent;
  color: var(--text-muted);
  cursor: pointer;
  font-size: 12px;
}
.hint-chip:hover { color: var(--text); border-color: var(--accent); }

.composer {
  display: flex;
  gap: 10px;
  padding: 12px 24px 20px;
  border-top: 1px solid var(--border);
}
.composer textarea {
  flex: 1;
  resize: none;
  padding: 10px 12px;
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  font-family: var(--font);
  font-size: 14px;
  max-height: 120px;
}
.composer textarea:focus { outline: none; border-color: var(--accent); }
.send-btn {
  padding: 0 18px;
  border: none;
  border-radius: var(--radius);
  background: var(--accent);
  color: #0d1117;
  font-weight: 600;
  cursor: pointer;
}
.send-btn:disabled { opacity: 0.5; cursor: default; }

.toast {
  position: fixed;
  bottom: 20px;
  right: 20px;
  background: var(--surface);
  border: 1px solid var(--red);
  color: var(--red);
  padding: 10px 14px;
  border-radius: var(--radius);
  display: none;
}
</style>
</head>
<body>
<div class="app">
  <aside>
    <h1>🤖 CodeMentor</h1>

    <section>
      <h2>Subject</h2>
      <div class="subject-buttons" id="subjects"></div>
    </section>

    <section>
      <h2>Topics</h2>
      <ul class="topic-list" id="topics"></ul>
    </section>

    <section class="key-panel">
      <h2>API key</h2>
      <div class="key-status"><span class="key-dot" id="key-dot"></span><span id="key-label">not configured</span></div>
      <input type="password" id="key-input" placeholder="Gemini API key">
      <div class="row">
        <button class="btn" id="key-save">Save</button>
        <button class="btn danger" id="key-reset">Reset</button>
      </div>
    </section>

    <section>
      <button class="btn danger" id="clear-history">Clear history</button>
    </section>
  </aside>

  <main>
    <div class="chat-header">
      <span class="label" id="subject-label"></span>
      <span class="meta" id="turn-count"></span>
    </div>
    <div class="messages" id="messages"></div>
    <div class="hints" id="hints"></div>
    <div class="composer">
      <textarea id="input" rows="1" placeholder="Ask about a concept, paste an error, or describe what you're stuck on..."></textarea>
      <button class="send-btn" id="send">Send</button>
    </div>
  </main>
</div>
<div class="toast" id="toast"></div>

<script>
const $ = (id) => document.getElementById(id);
let busy = false;

const TYPING_HTML =
  '<div class="message assistant-message typing-message pending"><div class="message-avatar">🤖</div>' +
  '<div class="message-content"><div class="typing-indicator"><div class="typing-dot"></div>' +
  '<div class="typing-dot"></div><div class="typing-dot"></div></div></div></div>';

function escapeHtml(text) {
  return text.replace(/[&<>"']/g, (c) => ({
    '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
  })[c]);
}

function scrollToBottom() {
  const box = $('messages');
  box.scrollTop = box.scrollHeight;
}

function toast(msg) {
  const el = $('toast');
  el.textContent = msg;
  el.style.display = 'block';
  setTimeout(() => { el.style.display = 'none'; }, 4000);
}

function draw(view) {
  $('messages').innerHTML = view.html;
  $('subject-label').textContent = view.subject_label;
  $('turn-count').textContent = view.turns + (view.turns === 1 ? ' message' : ' messages');

  const subjects = $('subjects');
  subjects.innerHTML = '';
  for (const s of view.subjects) {
    const b = document.createElement('button');
    b.className = 'subject-btn' + (s.id === view.subject ? ' active' : '');
    b.textContent = s.label;
    b.onclick = () => { if (s.id !== view.subject) post('/api/subject', { subject: s.id }); };
    subjects.appendChild(b);
  }

  const topics = $('topics');
  topics.innerHTML = '';
  for (const t of view.topics) {
    const li = document.createElement('li');
    li.className = 'topic-item';
    li.textContent = t;
    li.onclick = () => sendVia('/api/topic', { topic: t }, 'Can you explain ' + t + '?');
    topics.appendChild(li);
  }

  const hints = $('hints');
  hints.innerHTML = '';
  for (const h of view.hints) {
    const b = document.createElement('button');
    b.className = 'hint-chip';
    b.textContent = h;
    b.onclick = () => sendVia('/api/hint', { hint: h }, h);
    hints.appendChild(b);
  }

  $('key-dot').className = 'key-dot' + (view.api_key_configured ? ' ok' : '');
  $('key-label').textContent = view.api_key_configured ? 'configured' : 'not configured';

  scrollToBottom();
}

function refreshSession() {
  return fetch('/api/session').then((r) => r.json()).then(draw);
}

// Optimistic nodes are dropped first so a failed redraw still leaves the
// panel matching the server.
function dropPending() {
  $('messages').querySelectorAll('.pending').forEach((n) => n.remove());
  return refreshSession().catch(() => {});
}

async function post(path, payload) {
  const resp = await fetch(path, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(payload || {}),
  });
  const data = await resp.json();
  if (!resp.ok) {
    toast(data.error || ('request failed: ' + resp.status));
    return null;
  }
  draw(data.session || data);
  return data;
}

// The server answers only once the model has replied, so the question and
// a typing indicator are drawn locally in the meantime.
async function sendVia(path, payload, preview) {
  if (busy || !preview.trim()) return;
  busy = true;
  $('send').disabled = true;

  const box = $('messages');
  box.insertAdjacentHTML('beforeend',
    '<div class="message user-message pending"><div class="message-avatar">👨‍💻</div>' +
    '<div class="message-content"><div class="message-text">' +
    escapeHtml(preview.trim()).replace(/\n/g, '<br>') + '</div></div></div>');
  box.insertAdjacentHTML('beforeend', TYPING_HTML);
  scrollToBottom();

  try {
    if (!(await post(path, payload))) await dropPending();
  } catch (e) {
    toast('could not reach codementor: ' + e);
    await dropPending();
  } finally {
    busy = false;
    $('send').disabled = false;
    $('input').focus();
  }
}

function submit() {
  const input = $('input');
  const text = input.value;
  if (!text.trim()) return;
  input.value = '';
  autoResize();
  sendVia('/api/send', { text }, text);
}

function autoResize() {
  const input = $('input');
  input.style.height = 'auto';
  input.style.height = Math.min(input.scrollHeight, 120) + 'px';
}

$('input').addEventListener('keydown', (e) => {
  if (e.key === 'Enter' && !e.shiftKey) {
    e.preventDefault();
    submit();
  }
});
$('input').addEventListener('input', autoResize);
$('send').onclick = submit;

$('key-save').onclick = async () => {
  const key = $('key-input').value.trim();
  if (!key) return;
  if (await post('/api/key', { key })) $('key-input').value = '';
};
$('key-reset').onclick = () => post('/api/key/reset');
$('clear-history').onclick = () => {
  if (confirm('Clear the whole conversation?')) post('/api/history/clear');
};

refreshSession().catch((e) => toast(String(e)));
</script>
</body>
</html>
"##;
